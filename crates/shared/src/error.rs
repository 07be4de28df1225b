use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DomainError {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}
