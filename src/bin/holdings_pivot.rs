fn main() {
    holdings_pivot::cmd::command_main();
}
