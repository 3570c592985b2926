pub mod fd_greeks;
pub mod mc_engine;
pub mod payoffs;
