use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    recdata::example_apps::run_fetch_dataset(std::env::args().skip(1))
}
