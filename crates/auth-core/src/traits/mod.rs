//! Ports - repository and collaborator interfaces the domain depends on

mod collaborators;
mod repositories;

pub use collaborators::{BiometricTokenVault, NoopBiometricVault, NoopOtpSender, OtpSender};
pub use repositories::{
    OtpRepository, PasswordResetRepository, RefreshTokenRepository, RepoResult, ResetConsumption,
    UserRepository,
};
