pub mod challenge_store;
pub use challenge_store::{Challenge, ChallengeStore, VerifyOutcome};

pub mod otp_service;
pub use otp_service::{ClientInfo, OtpError, OtpService, VerifiedLogin};

pub mod otp_service_impl;
pub use otp_service_impl::DefaultOtpService;

pub mod token_service;
pub use token_service::{TokenError, TokenKind, TokenService};

pub mod notify;
pub use notify::{HttpMailer, Mailer, NoopMailer};

pub mod export;
pub mod reporting;
pub mod useragent;

pub use reporting::StatsReport;
