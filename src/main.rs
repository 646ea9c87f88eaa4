fn main() {
    cropdoc_lib::run()
}
