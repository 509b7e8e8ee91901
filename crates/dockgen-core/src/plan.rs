use std::collections::BTreeSet;

/// Base image used when the document does not name one.
pub const DEFAULT_BASE_IMAGE: &str = "ubuntu";

/// Destination of a staged file when only a source is given.
pub const DEFAULT_DESTINATION: &str = "/";

/// Packages needed to register an apt repository with a source line.
const REPOSITORY_REQUIREMENTS: [&str; 2] = ["wget", "ssl-cert"];

/// Packages needed to register a Launchpad PPA.
const PPA_REQUIREMENTS: [&str; 2] = ["software-properties-common", "python-software-properties"];

/// One logical unit of the merged `RUN` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Inline shell comment, rendered as `` `# text` ``.
    Comment(String),
    /// Visual separator carrying no command.
    Blank,
    /// A complete shell command, chained to the next one with `&&`.
    Command(String),
    /// A command line whose arguments continue on the next line.
    Continued(String),
}

impl Fragment {
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }

    pub fn command(text: impl Into<String>) -> Self {
        Self::Command(text.into())
    }

    /// Classify a raw line of user shell text.
    ///
    /// `# ...` becomes a comment, an empty line becomes a separator, and
    /// anything else is a command. Surrounding whitespace is dropped.
    pub fn classify(raw: &str) -> Self {
        let line = raw.trim();
        if let Some(comment) = line.strip_prefix('#') {
            Self::comment(comment.trim())
        } else if line.is_empty() {
            Self::Blank
        } else {
            Self::command(line)
        }
    }
}

/// Build phases of the merged `RUN` block, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Begin,
    PreInstall,
    Install,
    PostInstall,
    Run,
    End,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::Begin,
        Bucket::PreInstall,
        Bucket::Install,
        Bucket::PostInstall,
        Bucket::Run,
        Bucket::End,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// A file copied into the image with `ADD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

/// Accumulated build actions, replayed from a recipe document and consumed
/// read-only by the renderer.
///
/// Package and maintainer sets iterate in sorted order so that rendering the
/// same plan always yields the same text.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    base_image: String,
    user: Option<String>,
    service: Option<String>,
    maintainers: BTreeSet<String>,
    required_packages: BTreeSet<String>,
    requested_packages: BTreeSet<String>,
    exposed_ports: Vec<u16>,
    working_directory: Option<String>,
    files_before: Vec<StagedFile>,
    files_after: Vec<StagedFile>,
    env_vars: Vec<EnvVar>,
    buckets: [Vec<Fragment>; 6],
    startup_command: Option<Vec<String>>,
}

impl Default for BuildPlan {
    fn default() -> Self {
        Self {
            base_image: DEFAULT_BASE_IMAGE.to_owned(),
            user: None,
            service: None,
            maintainers: BTreeSet::new(),
            required_packages: BTreeSet::new(),
            requested_packages: BTreeSet::new(),
            exposed_ports: Vec::new(),
            working_directory: None,
            files_before: Vec::new(),
            files_after: Vec::new(),
            env_vars: Vec::new(),
            buckets: Default::default(),
            startup_command: None,
        }
    }
}

impl BuildPlan {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Metadata ──

    pub fn set_base_image(&mut self, image: impl Into<String>) {
        self.base_image = image.into();
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    /// Name of the init service enabled on container startup.
    pub fn set_service(&mut self, service: impl Into<String>) {
        self.service = Some(service.into());
    }

    pub fn set_working_directory(&mut self, dir: impl Into<String>) {
        self.working_directory = Some(dir.into());
    }

    pub fn set_startup_command<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.startup_command = Some(tokens.into_iter().map(Into::into).collect());
    }

    pub fn add_maintainer(&mut self, maintainer: impl Into<String>) {
        self.maintainers.insert(maintainer.into());
    }

    pub fn add_env_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env_vars.push(EnvVar {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn expose(&mut self, port: u16) {
        self.exposed_ports.push(port);
    }

    // ── Staged files ──

    /// Stage a file before the `RUN` block.
    pub fn add_file_before(&mut self, source: impl Into<String>, destination: impl Into<String>) {
        self.files_before.push(StagedFile {
            source: source.into(),
            destination: destination.into(),
        });
    }

    /// Stage a file after the `RUN` block.
    pub fn add_file_after(&mut self, source: impl Into<String>, destination: impl Into<String>) {
        self.files_after.push(StagedFile {
            source: source.into(),
            destination: destination.into(),
        });
    }

    pub fn add_file_before_to_root(&mut self, source: impl Into<String>) {
        self.add_file_before(source, DEFAULT_DESTINATION);
    }

    pub fn add_file_after_to_root(&mut self, source: impl Into<String>) {
        self.add_file_after(source, DEFAULT_DESTINATION);
    }

    // ── Command buckets ──

    pub fn push(&mut self, bucket: Bucket, fragment: Fragment) {
        self.buckets[bucket.index()].push(fragment);
    }

    /// Register an apt source line, optionally importing its signing key.
    ///
    /// The source line lands in `/etc/apt/sources.list.d/<name>.list` with
    /// `name` lower-cased.
    pub fn add_repository(&mut self, name: &str, source_line: &str, key_url: Option<&str>) {
        self.push(
            Bucket::PreInstall,
            Fragment::comment(format!("Adding {name} repository")),
        );
        if let Some(key_url) = key_url {
            self.push(
                Bucket::PreInstall,
                Fragment::command(format!("wget -O - {key_url} | apt-key add -")),
            );
        }
        self.push(
            Bucket::PreInstall,
            Fragment::command(format!(
                "echo '{source_line}' >> /etc/apt/sources.list.d/{}.list",
                name.to_lowercase()
            )),
        );
        self.push(Bucket::PreInstall, Fragment::Blank);

        self.require(&REPOSITORY_REQUIREMENTS);
    }

    pub fn add_ppa(&mut self, name: &str, ppa: &str) {
        self.push(
            Bucket::PreInstall,
            Fragment::comment(format!("Adding {name} PPA")),
        );
        self.push(
            Bucket::PreInstall,
            Fragment::command(format!("add-apt-repository -y {ppa}")),
        );
        self.push(Bucket::PreInstall, Fragment::Blank);

        self.require(&PPA_REQUIREMENTS);
    }

    pub fn install_package(&mut self, package: impl Into<String>) {
        self.requested_packages.insert(package.into());
    }

    /// Route one line of user shell text into the `run` bucket.
    pub fn add_run_line(&mut self, raw: &str) {
        self.push(Bucket::Run, Fragment::classify(raw));
    }

    fn require(&mut self, packages: &[&str]) {
        self.required_packages
            .extend(packages.iter().map(|p| (*p).to_owned()));
    }

    // ── Accessors ──

    pub fn base_image(&self) -> &str {
        &self.base_image
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    pub fn startup_command(&self) -> Option<&[String]> {
        self.startup_command.as_deref()
    }

    pub fn maintainers(&self) -> &BTreeSet<String> {
        &self.maintainers
    }

    /// Packages implied by repository and PPA registration.
    pub fn required_packages(&self) -> &BTreeSet<String> {
        &self.required_packages
    }

    /// Packages installed explicitly, possibly overlapping the required set.
    pub fn requested_packages(&self) -> &BTreeSet<String> {
        &self.requested_packages
    }

    pub fn env_vars(&self) -> &[EnvVar] {
        &self.env_vars
    }

    pub fn exposed_ports(&self) -> &[u16] {
        &self.exposed_ports
    }

    pub fn files_before(&self) -> &[StagedFile] {
        &self.files_before
    }

    pub fn files_after(&self) -> &[StagedFile] {
        &self.files_after
    }

    pub fn bucket(&self, bucket: Bucket) -> &[Fragment] {
        &self.buckets[bucket.index()]
    }
}
