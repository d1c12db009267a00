use std::env;

use secrecy::SecretString;

/// Installs a test subscriber; repeated calls are ignored.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Returns the API key from the environment (or `.env`), or `None` to skip a live test.
pub fn get_api_key_or_skip(var_name: &str, test_name: &str) -> Option<SecretString> {
    dotenv::dotenv().ok();

    match env::var(var_name) {
        Ok(key) if !key.is_empty() => Some(SecretString::from(key)),
        _ => {
            println!(
                "Skipping integration test {} - {} environment variable not set.",
                test_name, var_name
            );
            None
        }
    }
}

pub fn test_key() -> SecretString {
    SecretString::from("test-key".to_string())
}
