pub mod bs_analytic;
pub mod path_value;
pub mod surface;
