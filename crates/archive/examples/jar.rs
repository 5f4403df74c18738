use std::{env, fs::File};

use jarview_archive::JavaArchive;

fn main() {
    pretty_env_logger::init();

    let path = env::args().nth(1).expect("usage: jar <path-to-jar>");
    let file = File::open(&path).unwrap();

    let archive = JavaArchive::read(&path, file).unwrap();
    let tree = archive.tree();

    for id in archive.packages() {
        let name = tree.qualified_name(id);
        if name.is_empty() {
            println!("{}", path);
        } else {
            println!("{}", name);
        }

        let node = tree.node(id);
        for class in node.classes() {
            println!(
                "    {} (v{})",
                class.name,
                class.class_file.version()
            );
        }
        for resource in node.resources() {
            println!(
                "    {}.{} ({} bytes)",
                resource.name,
                resource.extension,
                resource.content.len()
            );
        }
    }

    for skipped in archive.skipped() {
        eprintln!("skipped {}: {}", skipped.path, skipped.error);
    }
}
