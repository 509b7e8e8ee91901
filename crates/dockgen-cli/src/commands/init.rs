use std::path::Path;

use anyhow::Context;

use super::DEFAULT_INPUT;

const STARTER_DOCUMENT: &str = r#"# dockgen recipe document
# Run `dockgen` to turn this file into a Dockerfile.

Maintainers:
  - Example Maintainer <maintainer@example.com>

From: ubuntu:22.04

# User: www-data

Env:
  - DEBIAN_FRONTEND: noninteractive

# Service: nginx

# Add_Before:
#   - conf/nginx.conf: /etc/nginx/nginx.conf

Repositories:
  - Name: Nginx
    URL: ppa:nginx/stable
#  - Name: Docker
#    URL: deb https://download.docker.com/linux/ubuntu jammy stable
#    Key: https://download.docker.com/linux/ubuntu/gpg

Packages:
  - nginx

Run: |
  # Remove the default site
  rm -f /etc/nginx/sites-enabled/default

# Add_After:
#   - site/: /var/www/html

Expose:
  - 80

Command: nginx -g daemon off;

# Work_Dir: /var/www/html
"#;

/// Write a starter Dockerfile.yml into the current directory.
pub fn init(force: bool) -> anyhow::Result<()> {
    let path = Path::new(DEFAULT_INPUT);
    if path.exists() && !force {
        eprintln!("{DEFAULT_INPUT} already exists, skipping (pass --force to overwrite)");
        return Ok(());
    }

    std::fs::write(path, STARTER_DOCUMENT)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {DEFAULT_INPUT}");
    println!();
    println!("Next steps:");
    println!();
    println!("  1. Edit {DEFAULT_INPUT} to describe your image");
    println!("  2. Generate the Dockerfile:");
    println!("     dockgen");

    Ok(())
}
