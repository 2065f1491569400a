//! mbal: Reservoir Material Balance Toolkit
//!
//! Classical material-balance analysis for oil and gas reservoirs, computing
//! in metric units internally with transparent field-unit conversion.
//!
//! ## Modules
//!
//! - **PVT**: Pressure-indexed fluid property tables with linear interpolation
//! - **Z-Factor**: Dranchuk–Abou-Kassem gas compressibility (Newton–Raphson)
//! - **Oil Engine**: STOIIP from the generalized material balance equation
//! - **Gas Engine**: GIIP via volumetric expansion and P/Z decline
//! - **Gas Cap Search**: Havlena–Odeh straight-line calibration of the gas cap ratio
//! - **Darcy Flow**: Steady-state radial inflow with skin decomposition

// Analysis modules
pub mod correlations;
pub mod darcy;
pub mod error;
pub mod gas;
pub mod gascap;
pub mod oil;
pub mod pvt;
pub mod stats;
pub mod units;
pub mod zfactor;

// Re-export error handling
pub use error::{MbalError, Result};

// Re-export unit handling
pub use units::UnitSystem;

// Re-export the PVT table
pub use pvt::{PvtInput, PvtProperty, PvtSnapshot, PvtTable};

// Re-export the oil material balance engine
pub use oil::{
    ExpansionTerms, MaterialBalancePoint, OilReservoir, OilReservoirConfig, ProductionHistory,
};

// Re-export the gas material balance engine
pub use gas::{GasMbeMethod, GasProductionHistory, GasReservoir, GasReservoirConfig, PzPoint};

// Re-export gas cap calibration
pub use gascap::{gas_cap_search, GasCapCandidate, GasCapSearchResult};

// Re-export Z-factor solvers
pub use zfactor::{z_factor_dak, z_factor_dak_numerical, ZFactorOptions};

// Re-export batch statistics
pub use stats::{BatchEstimate, EstimateStatistics, LinearFit};

// Re-export radial flow
pub use darcy::{
    DarcyFlowResult, DarcyRadialFlow, DarcyWellParameters, FlowSpec, PressureAnchor,
};
