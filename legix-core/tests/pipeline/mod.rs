mod convert;
mod failures;
mod roundtrip;
