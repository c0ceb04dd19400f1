use chart_layers::ChartConfiguration;
use chart_layers::render::FontSpec;

#[test]
fn configuration_survives_versioned_json() {
    let configuration = ChartConfiguration::default()
        .with_bar_geometry(8.0, 3.0)
        .with_price_precision(4)
        .with_caption_font(FontSpec::system(11.0));
    let json = configuration.to_json_pretty().expect("serialize");
    assert!(json.contains("\"schema_version\": 1"));

    let restored = ChartConfiguration::from_json_str(&json).expect("parse");
    assert_eq!(restored, configuration);
    assert_eq!(restored.bar_pitch(), 11.0);
}

#[test]
fn bare_objects_fill_missing_fields_with_defaults() {
    let restored =
        ChartConfiguration::from_json_str(r#"{ "bar_width": 10.0 }"#).expect("partial config");
    assert_eq!(restored.bar_width, 10.0);
    assert_eq!(restored.spacing, ChartConfiguration::default().spacing);
    assert_eq!(restored.price_precision, 2);
}

#[test]
fn invalid_configurations_are_rejected_on_load() {
    assert!(ChartConfiguration::from_json_str(r#"{ "bar_width": 0.0 }"#).is_err());
    assert!(
        ChartConfiguration::from_json_str(r#"{ "bar_width": 4.0, "shadow_line_width": 5.0 }"#)
            .is_err()
    );
    assert!(ChartConfiguration::from_json_str("not json").is_err());
}
