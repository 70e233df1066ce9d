use std::io::Write;

use spacex_shooter::settings::Settings;
use spacex_shooter::Error;

#[test]
fn defaults_match_classic_balance() {
    let s = Settings::default();
    assert_eq!(s.fps, 60);
    assert_eq!((s.width, s.height), (800.0, 600.0));
    assert_eq!(s.lives, 3);
    assert_eq!(s.shield_max, 100);
    assert_eq!(s.shot_delay_init, 500);
    assert_eq!(s.shot_delay_min, 200);
    assert_eq!(s.power_level_time_ms, 10_000);
    assert_eq!(s.bonus_odd, 0.95);
    assert_eq!(s.respawn_time_ms, 3_000);
    assert_eq!(s.mob_count, 8);
    assert!(s.validate().is_ok());
}

#[test]
fn empty_toml_gives_defaults() {
    assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
}

#[test]
fn toml_overrides_only_named_fields() {
    let s = Settings::from_toml_str("lives = 5\nmob_count = 12\nbonus_odd = 0.5\n").unwrap();
    assert_eq!(s.lives, 5);
    assert_eq!(s.mob_count, 12);
    assert_eq!(s.bonus_odd, 0.5);
    assert_eq!(s.shield_max, 100);
    assert_eq!(s.fps, 60);
}

#[test]
fn unknown_key_is_a_parse_error() {
    let err = Settings::from_toml_str("livez = 5\n").unwrap_err();
    assert!(matches!(err, Error::SettingsParse(_)), "{err}");
}

#[test]
fn wrong_type_is_a_parse_error() {
    let err = Settings::from_toml_str("lives = \"many\"\n").unwrap_err();
    assert!(matches!(err, Error::SettingsParse(_)), "{err}");
}

#[test]
fn out_of_range_values_are_rejected() {
    for text in [
        "bonus_odd = 1.5",
        "bonus_odd = -0.1",
        "fps = 0",
        "mob_count = 0",
        "lives = 0",
        "shield_max = 0",
        "shot_delay_min = 600",
        "width = 0.0",
        "height = -1.0",
        "width = 40.0",
    ] {
        let err = Settings::from_toml_str(text).unwrap_err();
        assert!(matches!(err, Error::InvalidSettings(_)), "{text}: {err}");
    }
}

#[test]
fn load_reads_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "respawn_time_ms = 1500").unwrap();
    let s = Settings::load(file.path()).unwrap();
    assert_eq!(s.respawn_time_ms, 1500);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err}");
}

#[test]
fn frame_follows_fps() {
    let s = Settings::from_toml_str("fps = 30").unwrap();
    assert_eq!(s.frame_ms(), 33);
    assert_eq!(s.frame().as_millis(), 33);
}
