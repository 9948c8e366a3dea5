#[macro_use]
extern crate rocket;

use motor_duel::rocket_initialize;

#[launch]
fn rocket() -> _ {
    rocket_initialize()
}
