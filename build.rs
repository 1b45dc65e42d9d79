// Build script to compile GLSL shaders to SPIR-V

use std::path::Path;
use std::process::Command;

const SHADERS: [&str; 3] = ["shaders/shader.vert", "shaders/shader2d.vert", "shaders/shader.frag"];

fn main() {
    println!("cargo:rerun-if-changed=shaders/");

    // Compile shaders using glslc (part of Vulkan SDK)
    for input in SHADERS {
        println!("cargo:rerun-if-changed={}", input);
        compile_shader(input, &format!("{}.spv", input));
    }
}

fn compile_shader(input: &str, output: &str) {
    let input_path = Path::new(input);
    let output_path = Path::new(output);

    if !input_path.exists() {
        println!("cargo:warning=shader source {} is missing, skipping", input);
        return;
    }

    let result = Command::new("glslc")
        .arg(input_path)
        .arg("-o")
        .arg(output_path)
        .status();

    match result {
        Ok(status) if status.success() => {
            println!("Compiled {} -> {}", input, output);
        }
        Ok(status) => {
            panic!("Failed to compile {}: exit code {:?}", input, status.code());
        }
        Err(e) => {
            println!("cargo:warning=glslc not found ({}), {} not compiled", e, input);
            eprintln!("Install the Vulkan SDK or compile manually:");
            eprintln!("  glslc {} -o {}", input, output);
        }
    }
}
