fn main() {
    stepgoal_lib::run()
}
