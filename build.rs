fn main() {
    // Windows: embed version info, plus manifest and icon when present
    #[cfg(target_os = "windows")]
    {
        let mut res = winres::WindowsResource::new();
        res.set("ProductName", "IPTV Catalog");
        res.set("FileDescription", "IPTV Catalog - iptv-org channel browser");

        if std::path::Path::new("app.manifest").exists() {
            res.set_manifest_file("app.manifest");
        }
        if std::path::Path::new("assets/icon.ico").exists() {
            res.set_icon("assets/icon.ico");
        }

        if let Err(e) = res.compile() {
            eprintln!("Warning: Failed to embed resources: {}", e);
        }
    }
}
