//! Host-level tests for build-time configuration parsing.

use led_clock::Error;
use led_clock::config::{WifiCredentials, parse_utc_offset};
use led_clock::unix_seconds::UnixSeconds;
use led_clock::WallTime;
use time::UtcOffset;

#[test]
fn utc_offset_accepts_signed_minutes() {
    assert_eq!(parse_utc_offset("0").unwrap(), UtcOffset::UTC);
    assert_eq!(
        parse_utc_offset("-480").unwrap(),
        UtcOffset::from_hms(-8, 0, 0).unwrap()
    );
    assert_eq!(
        parse_utc_offset(" 330 ").unwrap(),
        UtcOffset::from_hms(5, 30, 0).unwrap()
    );
}

#[test]
fn utc_offset_rejects_garbage_and_out_of_range() {
    assert!(matches!(parse_utc_offset("PST"), Err(Error::InvalidUtcOffset)));
    assert!(matches!(parse_utc_offset(""), Err(Error::InvalidUtcOffset)));
    assert!(matches!(parse_utc_offset("6000"), Err(Error::InvalidUtcOffset)));
}

#[test]
fn credentials_require_ssid() {
    assert!(matches!(
        WifiCredentials::new("", "secret"),
        Err(Error::CredentialsMissing)
    ));
}

#[test]
fn credentials_allow_open_network() {
    let credentials = WifiCredentials::new("Cafe", "").unwrap();
    assert_eq!(credentials.ssid.as_str(), "Cafe");
    assert!(credentials.password.is_empty());
}

#[test]
fn credentials_enforce_length_limits() {
    let ssid_33 = "s".repeat(33);
    let password_65 = "p".repeat(65);
    assert!(WifiCredentials::new(&"s".repeat(32), &"p".repeat(64)).is_ok());
    assert!(matches!(
        WifiCredentials::new(&ssid_33, "x"),
        Err(Error::CredentialsTooLong)
    ));
    assert!(matches!(
        WifiCredentials::new("home", &password_65),
        Err(Error::CredentialsTooLong)
    ));
}

#[test]
fn ntp_epoch_converts_to_unix() {
    assert_eq!(UnixSeconds::from_ntp_seconds(2_208_988_800), UnixSeconds(0));
    // Last second before the 32-bit NTP counter wraps.
    assert_eq!(
        UnixSeconds::from_ntp_seconds(u32::MAX),
        UnixSeconds(2_085_978_495)
    );
}

#[test]
fn ntp_counter_wrap_continues_into_next_era() {
    // 2036-02-07 06:28:16 UTC
    let wrapped = UnixSeconds::from_ntp_seconds(0);
    assert_eq!(wrapped, UnixSeconds(2_085_978_496));
    assert_eq!(
        wrapped.to_wall_time(UtcOffset::UTC),
        Some(WallTime::new(6, 28, 16).unwrap())
    );
    // Largest next-era reading still lands after the wrap, not before 1970.
    assert_eq!(
        UnixSeconds::from_ntp_seconds(2_208_988_799),
        UnixSeconds(4_294_967_295)
    );
}

#[test]
fn unix_seconds_to_local_wall_time() {
    // 2023-11-14 22:13:20 UTC
    let unix_seconds = UnixSeconds(1_700_000_000);
    assert_eq!(
        unix_seconds.to_wall_time(UtcOffset::UTC),
        Some(WallTime::new(22, 13, 20).unwrap())
    );
    assert_eq!(
        unix_seconds.to_wall_time(UtcOffset::from_hms(2, 0, 0).unwrap()),
        Some(WallTime::new(0, 13, 20).unwrap())
    );
}
