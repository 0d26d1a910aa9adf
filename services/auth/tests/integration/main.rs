mod otp_test;
mod token_test;
