//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios reproduce the `/proc` layouts of the kernel generations
//! the probe has to cope with.

use super::filesystem::MockFs;

impl MockFs {
    /// Host running a current kernel: `nf_conntrack_*` under
    /// `/proc/sys/net/netfilter` and a four-CPU statistics table.
    pub fn modern_kernel() -> Self {
        let mut fs = Self::new();

        fs.add_dir("/proc/sys/net/ipv4");
        fs.add_file("/proc/sys/net/netfilter/nf_conntrack_count", "42\n");
        fs.add_file("/proc/sys/net/netfilter/nf_conntrack_max", "262144\n");
        fs.add_file("/proc/sys/net/netfilter/nf_conntrack_buckets", "65536\n");
        fs.add_file(
            "/proc/net/stat/nf_conntrack",
            "\
entries  searched found new invalid ignore delete delete_list insert insert_failed drop  early_drop icmp_error  expect_new expect_create expect_delete search_restart
0000002a  00000001 00000000 00000000 00000010 00000100 00000000 00000000 00000000 00000000 00000000 00000000 00000000  00000000 00000000 00000000 00000001
0000002a  00000002 00000000 00000000 00000010 00000100 00000000 00000000 00000000 00000000 00000000 00000000 00000000  00000000 00000000 00000000 00000000
0000002a  00000003 00000000 00000000 00000010 00000100 00000000 00000000 00000000 00000000 00000000 00000000 00000000  00000000 00000000 00000000 00000002
0000002a  00000004 00000000 00000000 00000010 00000100 00000000 00000000 00000000 00000000 00000000 00000000 00000000  00000000 00000000 00000000 00000000
",
        );

        fs
    }

    /// Host running an old kernel: `ip_conntrack_*` under
    /// `/proc/sys/net/ipv4/netfilter` and no statistics table.
    pub fn legacy_kernel() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/sys/net/ipv4/netfilter/ip_conntrack_count", "17\n");
        fs.add_file("/proc/sys/net/ipv4/netfilter/ip_conntrack_max", "65536\n");

        fs
    }

    /// Host without the conntrack module loaded.
    pub fn no_conntrack() -> Self {
        let mut fs = Self::new();

        fs.add_dir("/proc/sys/net/ipv4");
        fs.add_dir("/proc/net/stat");

        fs
    }
}
