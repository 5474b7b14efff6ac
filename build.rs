fn main() {
    // embuild wires the ESP-IDF sysroot into the build environment.
    // Host builds (tests, telemetry-relay) have no espidf feature and
    // skip it entirely.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
