// File: ./src/cli.rs
//! Shared command-line interface logic, like printing help.

pub fn print_help(binary_name: &str) {
    println!(
        "Chime v{} - Alarm clock, countdown timer and voice alarm parser",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>] <command> [args]", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("COMMANDS:");
    println!("    parse <text>                    Show how a spoken sentence is understood");
    println!("    add <text>                      Create an alarm from a spoken sentence");
    println!("    voice <result.json>             Create an alarm from IAT dictation results");
    println!("                                    (one JSON fragment per line, '-' for stdin)");
    println!("    add-at <HH:MM> [days] [label]   Create an alarm explicitly");
    println!("    list                            List alarms");
    println!("    next                            Show the alarm that rings next");
    println!("    enable <id>                     Switch an alarm on");
    println!("    disable <id>                    Switch an alarm off");
    println!("    remove <id>                     Delete an alarm");
    println!("    snooze <id>                     Move an alarm to now + its snooze minutes");
    println!("    timer <HH:MM:SS>                Run a countdown in the terminal");
    println!("    watch                           Stay in the foreground and ring alarms");
    println!();
    println!("    <id> may be any unique prefix of the alarm id shown by 'list'.");
    println!();
    println!("DAYS:");
    println!("    daily | weekdays | weekend | once");
    println!("    mon,wed,fri       Comma list of English day names");
    println!("    0111110           Seven flags, Sunday first");
    println!();
    println!("VOICE SYNTAX:");
    println!("    The sentence must contain 闹钟, 提醒, 叫我, 叫醒 or 起床.");
    println!("    Time              7点, 下午3点, 晚上10点半, 6点15分, 14时");
    println!("    Repeat            每天, 工作日, 周一到周五, 周末, 周一 周三 ...");
    println!("    Label             提醒我<label>, 闹钟<label>, 叫我<label>");
    println!();
    println!("EXAMPLES:");
    println!("    {} add 每天下午3点提醒我吃药", binary_name);
    println!("    {} add 工作日早上7点半叫我起床", binary_name);
    println!("    {} add-at 06:45 weekdays Gym", binary_name);
    println!("    {} timer 00:25:00", binary_name);
    println!();
    println!("ENVIRONMENT:");
    println!("    CHIME_LOG         Log level override (error, warn, info, debug, trace)");
}
