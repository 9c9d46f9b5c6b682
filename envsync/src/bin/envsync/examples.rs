use crate::commands::{compare, dump, sync};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "compare",
            groups: compare::EXAMPLES,
        },
        CommandExample {
            name: "sync",
            groups: sync::EXAMPLES,
        },
        CommandExample {
            name: "dump",
            groups: dump::EXAMPLES,
        },
    ]
}
