pub mod discharge;
pub mod recharge;
