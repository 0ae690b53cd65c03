fn main() {
    println!("cargo:rerun-if-env-changed=GASGUARD_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=GASGUARD_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=GASGUARD_API_KEY");
    println!("cargo:rerun-if-env-changed=GASGUARD_DATABASE_URL");

    // Host builds (tests, fuzzing) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
