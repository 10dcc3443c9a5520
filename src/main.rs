mod app;
mod model;
mod picker;

use app::RepkgApp;

fn main() -> eframe::Result<()> {
    // Picker helper mode: the GUI re-invokes itself with these flags so the
    // native dialog runs on its own process main thread (see picker.rs).
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("--pick-folder") => {
            run_picker_helper(PickKind::Folder, args.get(1), &[]);
            return Ok(());
        }
        Some("--pick-file") => {
            let extensions: Vec<String> = args
                .get(2)
                .map(|s| s.split(',').map(str::to_string).collect())
                .unwrap_or_default();
            run_picker_helper(PickKind::File, args.get(1), &extensions);
            return Ok(());
        }
        _ => {}
    }

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "RePKG GUI",
        options,
        Box::new(|_cc| Box::new(RepkgApp::new())),
    )
}

enum PickKind {
    Folder,
    File,
}

fn run_picker_helper(kind: PickKind, title: Option<&String>, extensions: &[String]) {
    let mut dialog = rfd::FileDialog::new();
    if let Some(title) = title {
        dialog = dialog.set_title(title);
    }
    let picked = match kind {
        PickKind::Folder => dialog.pick_folder(),
        PickKind::File => {
            if !extensions.is_empty() {
                let refs: Vec<&str> = extensions.iter().map(String::as_str).collect();
                dialog = dialog.add_filter("Supported files", &refs);
            }
            dialog.pick_file()
        }
    };

    // Contract with the parent: the chosen absolute path on stdout with no
    // trailing newline, or no output at all on cancel.
    if let Some(path) = picked {
        print!("{}", path.display());
    }
}
