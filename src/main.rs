fn main() {
    if let Err(err) = todo_app_lib::run() {
        eprintln!("todo-app: {err}");
        std::process::exit(1);
    }
}
