use super::NodeProfile;

pub const N16: NodeProfile = NodeProfile {
    vdd: 0.7,
    vt: 0.18,
    tox: 0.7e-9,
    l_elec: 10e-9,
    drive_ratio: 1.7,
    leakage_anchors: [
        0.18, 0.2529, 0.3486, 0.4721, 0.6292, 0.8263, 1.071, 1.37, 1.732, 2.168, 2.686,
    ],
};

pub const N22: NodeProfile = NodeProfile {
    vdd: 0.8,
    vt: 0.20,
    tox: 0.8e-9,
    l_elec: 13e-9,
    drive_ratio: 1.8,
    leakage_anchors: [
        0.15, 0.2143, 0.3, 0.4123, 0.5571, 0.7412, 0.9722, 1.258, 1.609, 2.035, 2.546,
    ],
};

pub const N32: NodeProfile = NodeProfile {
    vdd: 0.9,
    vt: 0.22,
    tox: 0.9e-9,
    l_elec: 18e-9,
    drive_ratio: 1.9,
    leakage_anchors: [
        0.12, 0.1743, 0.2479, 0.3457, 0.4736, 0.6383, 0.8476, 1.11, 1.435, 1.834, 2.317,
    ],
};

pub const N45: NodeProfile = NodeProfile {
    vdd: 1.0,
    vt: 0.25,
    tox: 1.1e-9,
    l_elec: 25e-9,
    drive_ratio: 2.0,
    leakage_anchors: [
        0.1, 0.1489, 0.2168, 0.3091, 0.4323, 0.5941, 0.8035, 1.071, 1.407, 1.827, 2.343,
    ],
};

pub const N65: NodeProfile = NodeProfile {
    vdd: 1.1,
    vt: 0.28,
    tox: 1.3e-9,
    l_elec: 35e-9,
    drive_ratio: 2.1,
    leakage_anchors: [
        0.08, 0.1222, 0.182, 0.2653, 0.3788, 0.5308, 0.7313, 0.9916, 1.325, 1.747, 2.275,
    ],
};

pub const N90: NodeProfile = NodeProfile {
    vdd: 1.2,
    vt: 0.30,
    tox: 1.6e-9,
    l_elec: 50e-9,
    drive_ratio: 2.2,
    leakage_anchors: [
        0.05, 0.07763, 0.1175, 0.1737, 0.2515, 0.3571, 0.4981, 0.6833, 0.9232, 1.23, 1.617,
    ],
};

pub const N180: NodeProfile = NodeProfile {
    vdd: 1.8,
    vt: 0.40,
    tox: 3.5e-9,
    l_elec: 120e-9,
    drive_ratio: 2.2,
    leakage_anchors: [
        0.001, 0.001687, 0.002761, 0.004393, 0.006814, 0.01032, 0.01531, 0.02226, 0.03178,
        0.0446, 0.06163,
    ],
};
