//! Content-driven web font subsetting.
//!
//! Ship only the glyphs your pages actually use.

use fontsieve::core;

fn main() {
    let cli_args = core::platform::get_cli_args();
    if let Err(error) = core::run_app(cli_args) {
        core::platform::handle_error(error);
    }
}
