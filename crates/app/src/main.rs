mod host;

fn main() {
    let config = host::HostConfig::from_env();
    host::run(&config);
}
