//=========================================================================
// Meadow — Demo Cut-Scene
//=========================================================================
//
// Two characters meet in a meadow: the fox introduces itself, and the owl
// appears mid-conversation to answer.
//
// Expects an asset tree next to the working directory:
//   assets/fox/default/*.png
//   assets/owl/default/*.png
//   assets/fonts/dialog.ttf
//
// Run with: cargo run --example meadow
//
//=========================================================================

use gamebook_engine::prelude::*;

struct Meadow;

impl Script for Meadow {
    fn setup(&mut self, scene: &mut Scene) -> Result<(), EngineError> {
        let fox = scene.new_actor("fox", false, Orientation::Right)?;
        fox.set_position(250.0, 450.0);
        fox.set_dialog(Some("Hey! I'm Fern the fox."));
        fox.wait(2.0);
        fox.set_dialog(Some("What's your name?"));
        fox.wait(2.0);
        fox.set_dialog(None);

        let owl = scene.new_actor("owl", true, Orientation::Left)?;
        owl.set_position(1350.0, 450.0);
        owl.wait(4.0);
        owl.set_hidden(false);
        owl.wait(0.5);
        owl.set_dialog(Some("Hello, I'm Sage!"));

        Ok(())
    }
}

fn main() -> Result<(), EngineError> {
    env_logger::init();

    let mut gamebook = GamebookBuilder::new().with_title("Meadow").build()?;
    gamebook.set_scene(Box::new(Meadow))?;
    gamebook.run()
}
