fn main() {
    // Undefined libpython symbols are resolved by the interpreter at import time.
    pyo3_build_config::add_extension_module_link_args();
}
