/// Built-in programs installed into a store that lacks them:
/// `(name, content, read_only)`.
pub const SEEDS: [(&str, &str, bool); 4] = [
    ("README.TXT", README, true),
    ("HELLO.BF", HELLO, false),
    ("ECHO.BF", ",[.,]", false),
    ("FIB.BF", FIB, false),
];

const README: &str = "Tape Shell Commands
===================
help          - Show help
ls            - List programs
cat <name>    - View program
write <name> <text> - Save text
rm <name>     - Delete program
mv <old> <new> - Rename
run <name>    - Run program
bf <code>     - Run code directly
compile <name> - Translate to C
stats <name>  - Instruction counts
ir <name>     - Instruction listing
df            - Store usage
compact       - Reclaim abandoned space
time          - Show time
about         - System info
exit          - Leave
";

const HELLO: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

const FIB: &str = "+++++++++++
>+>>>>++++++++++++++++++++++++++++++++++++++++++++
>++++++++++++++++++++++++++++++++<<<<<<[>[>>>>>>+>
+<<<<<<<-]>>>>>>>[<<<<<<<+>>>>>>>-]<[>++++++++++[-
<-[>>+>+<<<-]>>>[<<<+>>>-]+<[>[-]<[-]]>[<<[>>>+>+<
<<<-]>>>[<<<+>>>-]+<[>[-]<[-]]>]<<<<[>>+>+<<<-]>>>[
<<<+>>>-]+<[>[-]<[-]]>[<<+>+>-]<<[>>+<<-]>>>]<<<<<
<[>+<-]>>]";
