

use model_exporter::Pipeline;

fn main() {

    env_logger::init();
    Pipeline::run();

}
