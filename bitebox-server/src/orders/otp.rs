//! Pickup codes

use rand::Rng;

pub const OTP_LEN: usize = 6;

/// Uniform 6-digit code, zero-padded (`000000`..=`999999`)
pub fn generate_otp() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_is_six_ascii_digits() {
        for _ in 0..1000 {
            let otp = generate_otp();
            assert_eq!(otp.len(), OTP_LEN);
            assert!(otp.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
