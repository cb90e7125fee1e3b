fn main() {
    std::process::exit(fhir_testgen_lib::run());
}
