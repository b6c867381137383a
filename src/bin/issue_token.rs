// Mint a bearer token signed with API_SECRET_KEY for service-to-service callers.
//
// Usage: issue_token [subject] [lifetime_minutes]

use tao_dividend_service::auth::token::{Claims, JwtKeys};
use tao_dividend_service::config::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    if config.uses_default_secret() {
        eprintln!("⚠️  API_SECRET_KEY not set, signing with the development secret");
    }

    let mut args = std::env::args().skip(1);
    let subject = args.next().unwrap_or_else(|| "service".to_string());
    let minutes: i64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 60 * 24 * 30,
    };

    let keys = JwtKeys::from_secret(&config.api_secret_key);
    let claims = Claims::for_minutes(Some(subject.clone()), None, minutes)?;
    let token = keys.issue(&claims)?;

    eprintln!("✅ Token for '{}' valid until {}", subject, claims.expires_at());
    println!("{}", token);
    Ok(())
}
