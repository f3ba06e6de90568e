fn main() {
    drone_deploy::app::cli::run();
}
