fn main() {
    println!("cargo:rerun-if-env-changed=VOLKNOB_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=VOLKNOB_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=VOLKNOB_CONFIG");

    // Host builds (tests, simulation) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
