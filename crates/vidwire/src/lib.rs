//! Top-level facade crate for vidwire.
//!
//! Re-exports the codec/protocol core, the host dispatcher, and the client
//! invoker so users can depend on a single crate.

pub mod core {
    pub use vidwire_core::*;
}

pub mod host {
    pub use vidwire_host::*;
}

pub mod client {
    pub use vidwire_client::*;
}
