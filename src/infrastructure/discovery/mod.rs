//! Network Discovery Adapters

mod mdns;
mod resolver;

pub use mdns::MdnsTransport;
pub use resolver::SystemResolver;
