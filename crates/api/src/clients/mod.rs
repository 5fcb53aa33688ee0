//! Outbound HTTP clients.

mod address_client;

pub use address_client::{
    normalize_cep, AddressLookup, Coordinates, PostalAddress, ViaCepNominatim,
};
