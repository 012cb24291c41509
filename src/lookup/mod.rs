pub mod cep;
pub mod geocode;

pub use cep::{CepAddress, CepClient, CepLookup, DeliveryZone, ZoneEligibility};
pub use geocode::{GeocodeClient, ReverseAddress};
