// make `std` available when testing
#![cfg_attr(not(test), no_std)]
pub mod battery;
pub mod bsp;
pub mod control;
pub mod edt;
pub mod flicker;
pub mod light_sampler;
pub mod mode;
pub mod power;
