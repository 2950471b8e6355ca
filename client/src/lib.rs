mod game;
mod render;
mod storage;
mod sync;

pub use game::PabloGame;
pub use render::*;
pub use storage::BrowserStorage;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}
