use station_climate_server::config::Config;

const DOCKERFILE: &str = include_str!("../Dockerfile");

#[test]
fn image_exposes_the_default_server_port() {
    let port = Config::with_data_dir("./data").server_port;
    let exposed: Vec<&str> = DOCKERFILE
        .lines()
        .filter_map(|line| line.strip_prefix("EXPOSE "))
        .collect();
    assert_eq!(exposed, vec![port.to_string()]);
}

#[test]
fn image_runs_the_server_binary_without_arguments() {
    assert!(DOCKERFILE.contains("--bin station_climate_server"));
    assert!(DOCKERFILE.contains("/release/station_climate_server /usr/local/bin/app"));
    assert_eq!(
        DOCKERFILE.lines().filter(|l| l.starts_with("CMD ")).last(),
        Some(r#"CMD ["app"]"#)
    );
}
