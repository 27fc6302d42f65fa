//! Library side of the `legix` binary: the inspect transforms, shared with the tests.

pub mod transforms;
