pub mod cycles;
pub mod drops;
