// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! HTML templates for the web UI

use minijinja::Environment;

const BASE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}{% endblock %} - Vitrine</title>
    <style>
        :root {
            --bg-primary: #1a1a2e;
            --bg-secondary: #16213e;
            --bg-card: #0f3460;
            --text-primary: #e8e8e8;
            --text-secondary: #a0a0a0;
            --accent: #e94560;
            --success: #00d9a5;
            --border: #2a2a4a;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }
        .container { max-width: 1400px; margin: 0 auto; padding: 20px; }
        nav {
            background: var(--bg-secondary);
            padding: 15px 20px;
            display: flex;
            align-items: center;
            gap: 30px;
            border-bottom: 1px solid var(--border);
        }
        nav .logo { font-size: 1.5em; font-weight: bold; color: var(--accent); text-decoration: none; }
        nav .who { margin-left: auto; color: var(--text-secondary); }
        a { color: var(--text-primary); }
        .card { background: var(--bg-card); border-radius: 12px; padding: 20px; margin-bottom: 20px; }
        .card h2 { margin-bottom: 15px; color: var(--accent); }
        .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 20px; }
        .folder .thumbs { display: grid; grid-template-columns: repeat(2, 1fr); gap: 4px; margin-bottom: 10px; }
        .folder .thumbs img { width: 100%; height: 80px; object-fit: cover; border-radius: 4px; }
        .artifact img { width: 100%; height: 180px; object-fit: cover; border-radius: 8px; }
        .tag {
            display: inline-block;
            background: var(--accent);
            color: white;
            padding: 2px 8px;
            border-radius: 12px;
            font-size: 0.8em;
            margin: 2px;
        }
        .muted { color: var(--text-secondary); font-size: 0.9em; }
        .badge {
            display: inline-block;
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            padding: 2px 8px;
            border-radius: 6px;
            font-size: 0.8em;
        }
        .error { background: var(--accent); padding: 10px; border-radius: 6px; margin-bottom: 15px; }
        .detail { position: fixed; top: 0; right: 0; width: 480px; height: 100%; overflow-y: auto;
                  background: var(--bg-secondary); padding: 20px; border-left: 1px solid var(--border);
                  transition: transform 0.4s; }
        .detail.closing { transform: translateX(100%); }
        .detail img { width: 100%; border-radius: 8px; }
        .private { border: 1px solid var(--accent); padding: 10px; border-radius: 6px; margin: 10px 0; }
        form.inline { display: inline; }
        label { display: block; margin-top: 8px; color: var(--text-secondary); }
        input, select, textarea { width: 100%; padding: 6px; background: var(--bg-primary);
                                  color: var(--text-primary); border: 1px solid var(--border); border-radius: 4px; }
        button { background: var(--accent); color: white; border: none; padding: 6px 14px;
                 border-radius: 6px; cursor: pointer; margin-top: 8px; }
        button.secondary { background: var(--bg-secondary); border: 1px solid var(--border); }
        .steps button.current { background: var(--success); }
    </style>
</head>
<body>
    <nav>
        <a href="/" class="logo">Vitrine</a>
        {% if user %}
        <a href="/archive">Archive</a>
        <span class="who">{{ user.username }} ({{ user.role }})</span>
        <form class="inline" method="post" action="/logout"><button class="secondary">Log out</button></form>
        {% endif %}
    </nav>
    <main class="container">
        {% if error %}<div class="error">{{ error }}</div>{% endif %}
        {% block content %}{% endblock %}
    </main>
</body>
</html>"#;

const LOGIN: &str = r#"{% extends "base.html" %}
{% block title %}Sign in{% endblock %}
{% block content %}
<div class="card" style="max-width: 420px; margin: 40px auto;">
    <h2>Sign in</h2>
    <form method="post" action="/login">
        <label for="username">Username</label>
        <input id="username" name="username" required>
        <label for="password">Password</label>
        <input id="password" name="password" type="password" required>
        <label for="role">Role</label>
        <select id="role" name="role">
            <option value="viewer">Viewer</option>
            <option value="admin">Admin</option>
        </select>
        <button>Sign in</button>
    </form>
</div>
{% endblock %}"#;

const ARCHIVE: &str = r#"{% extends "base.html" %}
{% block title %}Archive{% endblock %}
{% block content %}
{% if mode == "collections" %}
    <h1>Collections</h1>
    {% if permissions.canCreateCollections %}
    <div class="card">
        <form method="post" action="/archive/collections">
            <label for="name">New collection</label>
            <input id="name" name="name" placeholder="Collection name">
            <button>Create</button>
        </form>
        <form method="get" action="/archive/new"><button class="secondary">Add artifact</button></form>
    </div>
    {% endif %}
    <div class="grid">
    {% for c in collections %}
        <div class="card folder">
            <div class="thumbs">{% for image in c.preview %}<img src="{{ image }}" alt="">{% endfor %}</div>
            <h2>{{ c.name }}</h2>
            <span class="badge">{{ c.kind }}</span> <span class="muted">{{ c.itemCountLabel }}</span>
            <form method="post" action="/archive/open"><input type="hidden" name="id" value="{{ c.id }}"><button>Open</button></form>
        </div>
    {% else %}
        <p class="muted">No collections yet.</p>
    {% endfor %}
    </div>
{% else %}
    <form class="inline" method="post" action="/archive/back"><button class="secondary">&larr; Collections</button></form>
    <h1>{{ active.name if active else "All artifacts" }}</h1>
    {% if permissions.canAddArtifacts %}
    <form method="get" action="/archive/new">
        {% if active and active.kind == "manual" %}<input type="hidden" name="collection" value="{{ active.id }}">{% endif %}
        <button class="secondary">Add artifact here</button>
    </form>
    {% endif %}
    <div class="card">
        <form method="post" action="/archive/filters">
            <strong>Tags</strong>
            {% for t in options.tags %}<label><input type="checkbox" name="tags" value="{{ t }}" style="width:auto"{% if t in filters.tags %} checked{% endif %}> {{ t }}</label>{% endfor %}
            <strong>File types</strong>
            {% for t in options.fileTypes %}<label><input type="checkbox" name="file_types" value="{{ t }}" style="width:auto"{% if t in filters.fileTypes %} checked{% endif %}> {{ t }}</label>{% endfor %}
            <strong>Uploaders</strong>
            {% for u in options.uploaders %}<label><input type="checkbox" name="uploaders" value="{{ u }}" style="width:auto"{% if u in filters.uploaders %} checked{% endif %}> {{ u }}</label>{% endfor %}
            <label for="start">From</label><input id="start" type="date" name="start" value="{{ filters.dateRange.start or "" }}">
            <label for="end">To</label><input id="end" type="date" name="end" value="{{ filters.dateRange.end or "" }}">
            <button>Apply filters</button>
        </form>
    </div>
    <div class="grid">
    {% for a in cards %}
        <div class="card artifact">
            <a href="/archive/artifacts/{{ a.id }}"><img src="{{ a.image }}" alt="{{ a.title }}"></a>
            <h2>{{ a.title }}{% if a.privacyLock %} &#128274;{% endif %}</h2>
            {% if a.subject %}<div>{{ a.subject }}{% if a.pseudonymMarker %} <span class="badge">pseudonym</span>{% endif %}</div>{% endif %}
            {% if a.location %}<div class="muted">{{ a.location }}</div>{% endif %}
            <div>{% for t in a.tags %}<span class="tag">{{ t }}</span>{% endfor %}{% if a.moreTags %}<span class="tag">+{{ a.moreTags }} more</span>{% endif %}</div>
            <div class="muted">{{ a.uploader or "" }} &middot; {{ a.uploadDate }}{% if a.irbApproved %} &middot; IRB approved{% endif %}</div>
        </div>
    {% else %}
        <p class="muted">No artifacts match.</p>
    {% endfor %}
    </div>
{% endif %}

{% if detail %}
<aside class="detail{% if not detail_open %} closing{% endif %}">
    <form class="inline" method="post" action="/archive/detail/close"><button class="secondary">Close</button></form>
    <h1>{{ detail.title }}</h1>
    <img src="{{ detail.image }}" alt="{{ detail.title }}">
    <a href="/api/artifacts/{{ detail.id }}/download" download="{{ detail.downloadFilename }}">Download</a>
    {% if detail.privacyBanner %}
    <div class="private">
        <strong>{{ detail.privacyBanner.level }}</strong>
        {% if detail.privacyBanner.identityProtected %}<div>Identity protected</div>{% endif %}
        {% if detail.consentStatus %}
            {% if detail.consentStatus.irbApproval %}<div>IRB approved: {{ detail.consentStatus.irbApproval }}</div>{% endif %}
            {% if detail.consentStatus.formSignedOn %}<div>Consent signed {{ detail.consentStatus.formSignedOn }}</div>{% endif %}
        {% endif %}
    </div>
    {% endif %}
    {% if detail.subject %}
    <h2>Subject</h2>
    <div>{{ detail.subject.name }}{% if detail.subject.pseudonymNote %} <span class="muted">(pseudonym used to protect identity)</span>{% endif %}</div>
    {% if detail.subject.role %}<div class="muted">{{ detail.subject.role }}</div>{% endif %}
    {% if detail.subject.community %}<div class="muted">{{ detail.subject.community }}</div>{% endif %}
    {% endif %}
    {% if detail.context %}<h2>Context</h2><p>{{ detail.context }}</p>{% endif %}
    {% if detail.description %}<h2>Description</h2><p>{{ detail.description }}</p>{% endif %}
    {% if detail.location %}<h2>Location</h2><p>{{ detail.location.place }} {{ detail.location.city }} {{ detail.location.state }} {{ detail.location.country }}</p>{% endif %}
    {% if detail.timePeriod %}<h2>Time period</h2><p>{{ detail.timePeriod.created }} {{ detail.timePeriod.era }}</p>{% endif %}
    {% if detail.physicalDescription %}<h2>Physical description</h2><p>{{ detail.physicalDescription.materials }} {{ detail.physicalDescription.dimensions }} {{ detail.physicalDescription.condition }}</p>{% endif %}
    {% if detail.function %}<h2>Function</h2><p>{{ detail.function }}</p>{% endif %}
    {% if detail.meaning %}<h2>Meaning</h2><p>{{ detail.meaning }}</p>{% endif %}
    {% if detail.transcript %}<h2>Transcript</h2><p>{{ detail.transcript }}</p>{% endif %}
    {% if detail.additionalMedia %}<h2>Additional media</h2><ul>{% for m in detail.additionalMedia %}<li>{{ m.type }}: {{ m.title }}{% if m.duration %} ({{ m.duration }}){% endif %}{% if m.count %} ({{ m.count }}){% endif %}</li>{% endfor %}</ul>{% endif %}
    {% if detail.studentAnalysis %}<h2>Student analysis</h2><p>{{ detail.studentAnalysis.course }} &middot; {{ detail.studentAnalysis.student }}</p><p>{{ detail.studentAnalysis.summary }}</p>{% endif %}
    <div>{% for t in detail.tags %}<span class="tag">{{ t }}</span>{% endfor %}</div>
    <h2>Technical</h2>
    <div class="muted">{{ detail.technical.uploader or "" }} &middot; {{ detail.technical.uploadDate }} &middot; {{ detail.technical.fileType or "" }} {{ detail.technical.fileSize or "" }} {{ detail.technical.dimensions or "" }}</div>
    {% if detail.privacyNotes %}<div class="private">{{ detail.privacyNotes }}</div>{% endif %}
    {% if detail.usagePermissions %}
    <div class="private">
        Archive use: {{ detail.usagePermissions.archiveUse }} &middot;
        Classroom use: {{ detail.usagePermissions.classroomUse }} &middot;
        Public display: {{ detail.usagePermissions.publicDisplay }} &middot;
        Commercial use: {{ detail.usagePermissions.commercialUse }}
    </div>
    {% endif %}
</aside>
{% endif %}
{% endblock %}"#;

const DRAFT: &str = r#"{% extends "base.html" %}
{% block title %}New artifact{% endblock %}
{% block content %}
{% macro text(name, label, value) %}<label>{{ label }}</label><input name="{{ name }}" value="{{ value }}">{% endmacro %}
{% macro area(name, label, value) %}<label>{{ label }}</label><textarea name="{{ name }}" rows="4">{{ value }}</textarea>{% endmacro %}
{% macro flag(name, label, value) %}<label>{{ label }}</label><select name="{{ name }}"><option value="true"{% if value %} selected{% endif %}>Yes</option><option value="false"{% if not value %} selected{% endif %}>No</option></select>{% endmacro %}
<h1>New artifact{% if target %} in {{ target }}{% endif %}</h1>
<form method="post" action="/archive/new" class="card">
    <div class="steps">
    {% for s in steps %}<button name="action" value="step:{{ s.number }}" class="{{ 'current' if s.number == step else 'secondary' }}">{{ s.number }}. {{ s.title }}</button> {% endfor %}
    </div>
    <h2>{{ step_label }}</h2>
    {% if step == 1 %}
        {{ text("title", "Title *", draft.title) }}
        {{ text("image", "Image URL or path *", draft.image) }}
        <label>Collection</label>
        <select name="collectionId">
            <option value="">No collection (general archive)</option>
            {% for c in collections %}<option value="{{ c.id }}"{% if c.id == draft.collectionId %} selected{% endif %}>{{ c.name }}</option>{% endfor %}
        </select>
        {{ text("uploader", "Uploader", draft.uploader) }}
        {{ text("fileType", "File type", draft.fileType) }}
        {{ text("fileSize", "File size", draft.fileSize) }}
        {{ text("dimensions", "Dimensions", draft.dimensions) }}
        <label>Tags</label>
        <div>{% for t in draft.tags %}<span class="tag">{{ t }} <button name="action" value="remove_tag:{{ loop.index0 }}" class="secondary">&times;</button></span>{% endfor %}</div>
        <input name="tagInput" value="{{ draft.tagInput }}">
        <button name="action" value="add_tag" class="secondary">Add tag</button>
    {% elif step == 2 %}
        {{ area("context", "Context", draft.context) }}
        {{ area("description", "Description", draft.description) }}
        {{ area("transcript", "Transcript", draft.transcript) }}
    {% elif step == 3 %}
        {{ text("location.place", "Place", draft.location.place) }}
        {{ text("location.city", "City", draft.location.city) }}
        {{ text("location.state", "State", draft.location.state) }}
        {{ text("location.country", "Country", draft.location.country) }}
        {{ text("location.coordinates", "Coordinates", draft.location.coordinates) }}
    {% elif step == 4 %}
        {{ text("timePeriod.created", "Created", draft.timePeriod.created) }}
        {{ text("timePeriod.documented", "Documented", draft.timePeriod.documented) }}
        {{ text("timePeriod.era", "Era", draft.timePeriod.era) }}
        {{ text("subject.name", "Subject name", draft.subject.name) }}
        {{ flag("subject.isPseudonym", "Name is a pseudonym", draft.subject.isPseudonym) }}
        {{ text("subject.role", "Subject role", draft.subject.role) }}
        {{ text("subject.community", "Community", draft.subject.community) }}
    {% elif step == 5 %}
        {{ text("physicalDescription.materials", "Materials", draft.physicalDescription.materials) }}
        {{ text("physicalDescription.dimensions", "Dimensions", draft.physicalDescription.dimensions) }}
        {{ text("physicalDescription.condition", "Condition", draft.physicalDescription.condition) }}
        {{ text("physicalDescription.weight", "Weight", draft.physicalDescription.weight) }}
    {% elif step == 6 %}
        {{ area("function", "Function", draft.function) }}
        {{ area("meaning", "Meaning", draft.meaning) }}
        {{ flag("analysis.hasStudentWork", "Includes student analysis", draft.analysis.hasStudentWork) }}
        {{ text("analysis.course", "Course", draft.analysis.course) }}
        {{ text("analysis.student", "Student", draft.analysis.student) }}
        {{ area("analysis.summary", "Summary", draft.analysis.summary) }}
    {% else %}
        <label>Privacy level</label>
        <select name="privacy.level">{% for level in privacy_levels %}<option{% if level == draft.privacy.level %} selected{% endif %}>{{ level }}</option>{% endfor %}</select>
        {{ flag("privacy.publicAccess", "Publicly accessible", draft.privacy.publicAccess) }}
        {{ flag("privacy.identityProtected", "Identity protected", draft.privacy.identityProtected) }}
        {{ area("privacy.notes", "Privacy notes", draft.privacy.notes) }}
        {{ flag("consent.formSigned", "Consent form signed", draft.consent.formSigned) }}
        {{ text("consent.dateSigned", "Date signed", draft.consent.dateSigned) }}
        {{ flag("consent.permissions.archiveUse", "Archive use", draft.consent.permissions.archiveUse) }}
        {{ flag("consent.permissions.classroomUse", "Classroom use", draft.consent.permissions.classroomUse) }}
        {{ flag("consent.permissions.publicDisplay", "Public display", draft.consent.permissions.publicDisplay) }}
        {{ flag("consent.permissions.commercialUse", "Commercial use", draft.consent.permissions.commercialUse) }}
        {{ flag("consent.irbApproved", "IRB approved", draft.consent.irbApproved) }}
        {{ text("consent.irbNumber", "IRB number", draft.consent.irbNumber) }}
        {{ text("consent.irbDate", "IRB date", draft.consent.irbDate) }}
    {% endif %}
    <div>
        {% if step > 1 %}<button name="action" value="previous" class="secondary">Previous</button>{% endif %}
        {% if not is_last %}<button name="action" value="next">Next</button>{% endif %}
        <button name="action" value="submit"{% if not can_submit %} disabled{% endif %}>Add to archive</button>
        {% if not can_submit %}<span class="muted">Title and image are required to add the artifact.</span>{% endif %}
        <button name="action" value="cancel" class="secondary">Cancel</button>
    </div>
</form>
{% endblock %}"#;

/// Build the template environment used by every page handler
pub fn environment() -> crate::Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("base.html", BASE)?;
    env.add_template("login.html", LOGIN)?;
    env.add_template("archive.html", ARCHIVE)?;
    env.add_template("draft.html", DRAFT)?;
    Ok(env)
}
