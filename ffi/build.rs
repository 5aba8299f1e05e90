use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("GYM_SYNC_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out_dir.join("gym_sync.h"));
        }
        Err(e) => println!("cargo:warning=could not generate C header: {e}"),
    }
}
