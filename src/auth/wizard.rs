use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::api::models::{ForgotPasswordRequest, ResetPasswordRequest, VerifyOtpRequest};
use crate::error::AppError;

pub const OTP_LENGTH: usize = 4;
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid pattern")
});

/// Position in the forgot-password flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "step")]
pub enum ResetStep {
    RequestOtp,
    VerifyOtp { email: String },
    ResetPassword { email: String, otp: String },
    Completed,
}

/// Forgot-password flow: request OTP, verify OTP, set a new password.
///
/// Each `*_request` method validates input and builds the API payload for the
/// current step; the matching `*_accepted` method advances once the remote
/// call succeeded. A failed call leaves the step unchanged.
#[derive(Debug, Clone)]
pub struct PasswordResetWizard {
    step: ResetStep,
}

impl Default for PasswordResetWizard {
    fn default() -> Self {
        PasswordResetWizard {
            step: ResetStep::RequestOtp,
        }
    }
}

impl PasswordResetWizard {
    pub fn step(&self) -> &ResetStep {
        &self.step
    }

    pub fn otp_request(&self, email: &str) -> Result<ForgotPasswordRequest, AppError> {
        if self.step != ResetStep::RequestOtp {
            return Err(out_of_order());
        }
        let email = email.trim();
        if !EMAIL_REGEX.is_match(email) {
            return Err(AppError::Validation("Please enter a valid email address.".into()));
        }
        Ok(ForgotPasswordRequest {
            email: email.to_string(),
        })
    }

    pub fn otp_request_accepted(&mut self, request: ForgotPasswordRequest) {
        self.step = ResetStep::VerifyOtp {
            email: request.email,
        };
    }

    pub fn verify_request(&self, otp: &str) -> Result<VerifyOtpRequest, AppError> {
        let ResetStep::VerifyOtp { email } = &self.step else {
            return Err(out_of_order());
        };
        let otp = otp.trim();
        if otp.chars().count() != OTP_LENGTH {
            return Err(AppError::Validation(format!(
                "OTP must be {} characters.",
                OTP_LENGTH
            )));
        }
        Ok(VerifyOtpRequest {
            email: email.clone(),
            otp: otp.to_string(),
        })
    }

    pub fn verify_request_accepted(&mut self, request: VerifyOtpRequest) {
        self.step = ResetStep::ResetPassword {
            email: request.email,
            otp: request.otp,
        };
    }

    pub fn reset_request(
        &self,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<ResetPasswordRequest, AppError> {
        let ResetStep::ResetPassword { email, otp } = &self.step else {
            return Err(out_of_order());
        };
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LENGTH
            )));
        }
        if new_password != confirm_password {
            return Err(AppError::Validation("Passwords do not match.".into()));
        }
        Ok(ResetPasswordRequest {
            email: email.clone(),
            otp: otp.clone(),
            new_password: new_password.to_string(),
            confirm_password: confirm_password.to_string(),
        })
    }

    pub fn reset_request_accepted(&mut self) {
        self.step = ResetStep::Completed;
    }
}

fn out_of_order() -> AppError {
    AppError::Validation("This step is not available right now.".into())
}
